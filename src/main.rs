use std::io::{self, BufRead, Write};

use colored::Colorize;

use aplv::Apl;

fn main() {
    let mut apl = Apl::new(io::stdout());
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    print_prompt();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim() == ")off" {
            break;
        }
        if let Err(e) = apl.parse_and_eval(&line) {
            let _ = writeln!(stderr, "{}", e.to_string().red());
        }
        print_prompt();
    }
}

fn print_prompt() {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "        ");
    let _ = stderr.flush();
}
