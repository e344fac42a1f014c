#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        an_empty_source_produces_no_output:
            ""
            => OK
    }

    tests! {
        arithmetic_and_comparison_operators_follow_standard_precedence:
            r#"
            print 2 + 3 * 4;
            print 20 - 3 * 4;
            print 2 + 6 / 3;
            print 2 - 6 / 3;
            print false == 2 < 1;
            print false == 1 > 2;
            print false == 2 <= 1;
            print false == 1 >= 2;
            print 1 - 1;
            print 1 -1;
            print 1- 1;
            print 1-1;
            print (2 * (6 - (2 + 2)));
            "#
            => OK "14", "8", "4", "0", "true", "true", "true", "true", "0", "0", "0", "0", "4"
    }

    tests! {
        an_unrecognized_character_is_a_scan_error:
            "print \"ok\";\nvar x = 1 | 2;"
            => ERR "Unexpected character '|'"
    }
}
