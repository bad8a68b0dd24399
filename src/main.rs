use minsh::Interpreter;

fn main() {
    let mut shell = Interpreter::default();
    let code = match shell.repl() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("minsh: {e}");
            1
        }
    };
    std::process::exit(code);
}
