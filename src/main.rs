mod chart;
mod client;
mod cmd;
mod config;
mod dirs;
mod error;
mod key_reader;
mod prelude;
mod protocol;
mod resize;
mod screen;
mod session;
mod term;

fn main() {
    match crate::cmd::parse().and_then(|m| crate::cmd::run(&m)) {
        Ok(_) => {}
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
