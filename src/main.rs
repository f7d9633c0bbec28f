fn main() -> Result<(), Box<dyn std::error::Error>> {
    oye::cli::main()
}
