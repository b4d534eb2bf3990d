use std::process;

fn main() {
    money_core::init_with_default("money_core=error");

    if let Err(err) = money_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
