fn main() {
    tokensmith::cli::run();
}
