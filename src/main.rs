fn main() {
    if let Err(err) = repo_preview::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
