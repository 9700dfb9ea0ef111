#![cfg(feature = "gui")]
//! Desktop editor entrypoint.

fn main() {
    if let Err(err) = quicknote_gui::run() {
        eprintln!("quicknote gui failed: {}", err);
        std::process::exit(1);
    }
}
