mod app;
mod audio;
mod clock;
mod config;
mod contact;
mod error;
mod http;
mod i18n;
mod library;
mod listing;
mod player;
mod runtime;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
