fn main() {
    if let Err(e) = careflow_lib::run() {
        tracing::error!("CareFlow failed to start: {e}");
        eprintln!("careflow: {e}");
        std::process::exit(1);
    }
}
