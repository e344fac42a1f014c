#[macro_use]
mod common;

#[cfg(test)]
mod _for {
    tests! {
        a_for_loop_runs_the_initializer_once_then_the_condition_and_increment_each_pass:
            r#"
            for (var i = 0; i < 3; i = i + 1) { print i; }
            "#
            => OK "0", "1", "2"
    }

    tests! {
        omitting_the_initializer_is_allowed:
            r#"
            var i = 0;
            for (; i < 3; i = i + 1) { print i; }
            "#
            => OK "0", "1", "2"
    }

    tests! {
        omitting_the_condition_runs_forever_unless_broken_out_of:
            r#"
            for (var i = 0; ; i = i + 1) {
                if (i >= 3) break;
                print i;
            }
            "#
            => OK "0", "1", "2"
    }

    tests! {
        omitting_the_increment_is_allowed:
            r#"
            for (var i = 0; i < 3;) { print i; i = i + 1; }
            "#
            => OK "0", "1", "2"
    }

    tests! {
        continue_inside_a_for_loop_still_runs_the_increment:
            r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                print i;
            }
            "#
            => OK "0", "1", "3", "4"
    }

    tests! {
        a_closure_created_inside_the_loop_body_sees_the_current_value_when_called:
            r#"
            for (var i = 1; i < 4; i = i + 1) {
                def show() { print i; }
                show();
            }
            "#
            => OK "1", "2", "3"
    }

    tests! {
        a_class_declaration_is_not_allowed_as_a_for_initializer:
            "for (class Foo {}; false;) {}"
            => ERR "Expect expression"
    }

    tests! {
        break_exits_only_the_innermost_for_loop:
            r#"
            for (var i = 0; i < 2; i = i + 1) {
                for (var j = 0; j < 2; j = j + 1) {
                    if (j == 1) break;
                    print j;
                }
                print i;
            }
            "#
            => OK "0", "0", "0", "1"
    }
}
