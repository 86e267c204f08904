fn main() {
    if let Err(err) = mstab::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
