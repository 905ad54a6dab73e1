/// Command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    /// Print the effective settings as TOML and exit.
    pub dump_config: bool,
    /// Directories, files and URLs to play. Empty means the working directory.
    pub inputs: Vec<String>,
}

pub fn parse<I>(args: I) -> Args
where
    I: IntoIterator<Item = String>,
{
    let mut out = Args::default();
    let mut only_inputs = false;
    for arg in args {
        if only_inputs {
            out.inputs.push(arg);
            continue;
        }
        match arg.as_str() {
            "--dump-config" => out.dump_config = true,
            "--" => only_inputs = true,
            _ => out.inputs.push(arg),
        }
    }
    out
}
