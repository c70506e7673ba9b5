mod platform;

fn main() {
    if let Err(error) = platform::run_app() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
