#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        a_local_cannot_collide_with_a_parameter_of_the_same_name:
            "def f(a) { var a = 2; }"
            => ERR "Variable 'a' is already declared in this scope"
    }

    tests! {
        a_block_cannot_declare_the_same_local_twice:
            "{ var a = 1; var a = 2; }"
            => ERR "Variable 'a' is already declared in this scope"
    }

    tests! {
        a_function_cannot_declare_the_same_parameter_twice:
            "def f(arg, arg) {}"
            => ERR "Variable 'arg' is already declared in this scope"
    }

    tests! {
        a_global_read_inside_a_function_sees_the_value_at_call_time:
            r#"
            var a = "outer";
            def f() { print a; }
            f();
            "#
            => OK "outer"
    }

    tests! {
        variables_declared_mid_block_are_visible_to_statements_after_them:
            r#"
            {
                var a = "a";
                print a;
                var b = a + " b";
                print b;
                var c = a + " c";
                print c;
                var d = b + " d";
                print d;
            }
            "#
            => OK "a", "a b", "a c", "a b d"
    }

    tests! {
        a_nested_block_can_read_a_variable_from_an_enclosing_block:
            r#"
            var outer = "outer";
            { print outer; }
            "#
            => OK "outer"
    }

    tests! {
        a_method_can_declare_and_read_its_own_local:
            r#"
            class Foo { bar() { var local = "variable"; print local; } }
            Foo().bar();
            "#
            => OK "variable"
    }

    tests! {
        redeclaring_a_global_with_var_is_allowed:
            r#"
            var a = "value";
            var a;
            print a;
            "#
            => OK "nil"
    }

    tests! {
        reassigning_a_global_updates_it:
            r#"
            var a = 1;
            a = 2;
            print a;
            "#
            => OK "2"
    }

    tests! {
        two_sibling_blocks_may_each_declare_the_same_local_name:
            r#"
            { var a = "first"; print a; }
            { var a = "second"; print a; }
            "#
            => OK "first", "second"
    }

    tests! {
        a_local_can_shadow_an_outer_local_within_a_nested_block:
            r#"
            {
                var a = "outer";
                {
                    var a = "inner";
                    print a;
                }
                print a;
            }
            "#
            => OK "inner", "outer"
    }

    tests! {
        a_local_can_shadow_a_global_of_the_same_name:
            r#"
            var a = "global";
            { var a = "shadow"; print a; }
            print a;
            "#
            => OK "shadow", "global"
    }

    tests! {
        a_block_local_can_shadow_an_enclosing_block_local:
            r#"
            {
                var a = "local";
                { var a = "shadow"; print a; }
                print a;
            }
            "#
            => OK "shadow", "local"
    }

    tests! {
        reading_an_undefined_global_is_a_runtime_error:
            "print notDefined;"
            => ERR "Undefined variable 'notDefined'"
    }

    tests! {
        reading_an_undefined_local_is_a_runtime_error:
            "{ print notDefined; }"
            => ERR "Undefined variable 'notDefined'"
    }

    tests! {
        an_uninitialized_var_declaration_defaults_to_nil:
            "var a; print a;"
            => OK "nil"
    }

    tests! {
        an_error_after_unreachable_code_does_not_run:
            r#"
            def f() { return "ok"; print notDefined; }
            print f();
            "#
            => OK "ok"
    }

    tests! {
        using_false_as_a_variable_name_is_a_parse_error:
            "var false = 1;"
            => ERR "Expect variable name"
    }

    tests! {
        a_var_initializer_can_reference_an_existing_global:
            r#"
            var a = "value";
            var b = a;
            print b;
            "#
            => OK "value"
    }

    tests! {
        a_local_initializer_cannot_reference_itself:
            "{ var a = \"outer\"; { var a = a; } }"
            => ERR "Cannot read local variable in its own initializer"
    }

    tests! {
        using_nil_as_a_variable_name_is_a_parse_error:
            "var nil = 1;"
            => ERR "Expect variable name"
    }

    tests! {
        using_self_as_a_variable_name_is_a_parse_error:
            "var self = 1;"
            => ERR "Expect variable name"
    }
}
