// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use pharos_core::{CoreConfig, SyncMode, WinitHost};

fn main() -> Result<()> {
    env_logger::init();

    let config = CoreConfig {
        title: "Pharos Sandbox".to_string(),
        width: 1024,
        height: 768,
        sync_mode: SyncMode::Double,
        ..CoreConfig::default()
    };

    let mut last_rate = 0;
    let host = WinitHost::new(config)
        .on_tick(move |ctx| {
            if ctx.frame_rate != last_rate {
                last_rate = ctx.frame_rate;
                ctx.window
                    .set_title_fmt(format_args!("Pharos Sandbox — {last_rate} fps"));
            }
            if ctx.input.is_key_pressed("Escape") {
                ctx.exit.request();
            }
        })
        .on_exit(|_| log::info!("Sandbox shutting down."));

    let exit = host.exit_request();
    ctrlc::set_handler(move || exit.request())?;

    host.run()
}
