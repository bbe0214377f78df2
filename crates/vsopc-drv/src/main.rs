use vsopc_drv::DriverError;

fn main() {
    if let Err(e) = vsopc_drv::run() {
        match e {
            DriverError::Diagnostics(rendered) => eprintln!("{rendered}"),
            other => eprintln!("error: {other}"),
        }
        std::process::exit(1);
    }
}
