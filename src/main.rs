use std::process;

fn main() {
    if let Err(err) = yoo::cli::main() {
        eprintln!("❌ {err}");
        process::exit(1);
    }
}
