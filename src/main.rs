use std::io::{self, Write};
use std::{env, process};

use rocks_lang::rocks;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut rocks = rocks::new(&mut stdout, &mut stderr);

    match args.len() {
        n if n > 2 => {
            let _ = writeln!(io::stderr(), "Usage: rocks [script]");
            process::exit(64);
        }
        2 => rocks.run_file(args[1].clone()),
        _ => rocks.run_prompt(),
    };
}
