pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line() -> String {
    format!("driveaudit v{}", VERSION)
}

pub fn run() {
    println!("{}", version_line());
}
