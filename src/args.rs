use std::error::Error;
use std::path::PathBuf;

/// Cursor over the arguments of one command, with error messages that name
/// the command.
pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Next positional argument, or a usage error naming `what`.
    pub fn require(&mut self, what: &str) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide {} for {}", what, self.command_name).into()
        })
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Fail when arguments are left over.
    pub fn finish(mut self) -> Result<(), Box<dyn Error>> {
        match self.iter.next() {
            Some(extra) => Err(format!(
                "Unexpected argument for {}: {}",
                self.command_name, extra
            )
            .into()),
            None => Ok(()),
        }
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }
}

/// Flags accepted before or after the command name.
#[derive(Default, Debug)]
pub struct GlobalFlags {
    pub dir: Option<PathBuf>,
    pub plain: bool,
}

/// Pull `-d/--dir <path>` and `--plain` out of the raw arguments, leaving
/// the command and its own arguments in order.
pub fn split_global_flags(
    args: Vec<String>,
) -> Result<(GlobalFlags, Vec<String>), Box<dyn Error>> {
    let mut flags = GlobalFlags::default();
    let mut rest = Vec::with_capacity(args.len());
    let mut parser = ArgParser::new(args, "nsort");
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-d" | "--dir" => {
                flags.dir = Some(PathBuf::from(parser.extract_value(&arg)?));
            }
            "--plain" => flags.plain = true,
            _ => rest.push(arg),
        }
    }
    Ok((flags, rest))
}
