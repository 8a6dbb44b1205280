use clap::Parser;
use tinyboy::Args;
use tinyboy_core::StopReason;

fn main() {
    env_logger::init();

    // clap prints help and exits 0, or reports bad arguments and exits 2.
    let args = Args::parse();

    match tinyboy::run(&args) {
        Ok(summary) => {
            if let StopReason::Halted(reason) = summary.reason {
                eprintln!(
                    "CPU halted on unknown opcode 0x{:02X} at 0x{:04X}",
                    reason.opcode, reason.address
                );
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
