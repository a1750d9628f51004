use crate::cli::{read_source, DetectArgs};
use crate::language::detect;

pub fn execute(args: DetectArgs) -> anyhow::Result<()> {
    let code = read_source(&args.file)?;
    println!("{}", detect(&code));
    Ok(())
}
