//! `cmdpal exec`: drive the palette headlessly and run the selected item
//!
//! Opens the overlay, sets the query, moves the cursor down `--down` rows and
//! dispatches the highlighted item. Goes through the controller operations
//! directly so `[keys]` bindings never reinterpret the query text.

use std::sync::mpsc;

use anyhow::{anyhow, Result};
use clap::Parser;
use cmdpal_core::{Outcome, OverlayController, PaletteConfig};
use tracing::{debug, info};

use crate::catalog::{self, Effect};

#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Query to type into the palette
    #[arg(long, short = 'q')]
    pub query: String,

    /// Press Down this many times before Enter
    #[arg(long, short = 'd', default_value_t = 0)]
    pub down: usize,

    /// Print what would run instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_exec(args: ExecArgs, config: &PaletteConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let items = catalog::build_items(config, &tx);

    let close_tx = tx.clone();
    let mut palette = OverlayController::new(items, config.categories.clone())
        .with_keymap(config.keymap()?)
        .with_on_close(move |reason| {
            let _ = close_tx.send(Effect::PaletteClosed(reason));
        });

    palette.open();
    palette.set_query(args.query.as_str());
    for _ in 0..args.down {
        palette.move_down();
    }

    let id = match palette.dispatch_highlighted() {
        Outcome::Dispatched { id } => id,
        _ => {
            let message = palette
                .list()
                .empty_state()
                .map(|state| config.empty_message(state))
                .unwrap_or("Nothing was dispatched");
            return Err(anyhow!("{} (query: {:?})", message, args.query));
        }
    };
    info!(%id, "dispatched");

    for effect in rx.try_iter() {
        match effect {
            Effect::Message { text, .. } => println!("{}", text),
            Effect::Run { command, .. } if args.dry_run => {
                println!("would run: {}", command);
            }
            Effect::Run { id, command } => {
                let status = catalog::run_inherited(&command)?;
                if !status.success() {
                    return Err(anyhow!("{} exited with {}", id, status));
                }
            }
            Effect::PaletteClosed(reason) => {
                debug!(?reason, "palette closed");
            }
        }
    }

    Ok(())
}
