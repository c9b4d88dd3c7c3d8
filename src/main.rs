use runlens::cli;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.init_logging();
    if let Err(error) = command_line_interface.run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
