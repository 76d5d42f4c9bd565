mod log;

use std::io;

fn main() -> io::Result<()> {
    log::init();
    zxdis::cli::main()
}
