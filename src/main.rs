fn main() {
    if let Err(err) = mindkit::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
