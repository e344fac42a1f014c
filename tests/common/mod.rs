/// Runs `source` through the full pipeline and asserts its printed stdout.
/// `expected` lines are joined with newlines and a trailing newline is
/// added to match `print`'s own newline-per-call behavior (an empty list
/// means no output at all).
#[macro_export]
macro_rules! tests {
    ($name:ident: $source:expr => OK $($expected:expr),* $(,)?) => {
        #[test]
        fn $name() {
            use rocks_lang::rocks;

            let mut expected = vec![$($expected),*];
            let expected = match expected.len() {
                0 => String::new(),
                _ => {
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output: Vec<u8> = Vec::new();
            let mut errors: Vec<u8> = Vec::new();
            let status = {
                let mut interpreter = rocks::new(&mut output, &mut errors);
                interpreter.run_source($source)
            };

            assert_eq!(
                status, rocks_lang::RunStatus::Ok,
                "expected a clean run, got stderr: {}",
                String::from_utf8_lossy(&errors),
            );
            assert_eq!(expected, String::from_utf8(output).unwrap());
        }
    };

    // An ERR case checks that the run did not complete cleanly and that the
    // diagnostic text contains every expected fragment, rather than pinning
    // an exact line:column — the point under test is which rule fired, not
    // the scanner's column arithmetic.
    ($name:ident: $source:expr => ERR $($expected:expr),+ $(,)?) => {
        #[test]
        fn $name() {
            use rocks_lang::rocks;

            let mut output: Vec<u8> = Vec::new();
            let mut errors: Vec<u8> = Vec::new();
            let status = {
                let mut interpreter = rocks::new(&mut output, &mut errors);
                interpreter.run_source($source)
            };

            assert_ne!(status, rocks_lang::RunStatus::Ok, "expected a static or runtime error");

            let rendered = String::from_utf8(errors).unwrap();
            $(
                assert!(
                    rendered.contains($expected),
                    "expected stderr to contain {:?}, got {:?}", $expected, rendered,
                );
            )+
        }
    };
}
