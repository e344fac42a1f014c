#[macro_use]
mod common;

#[cfg(test)]
mod block {
    tests! {
        empty_block_is_a_valid_statement:
            "{} print \"ok\";"
            => OK "ok"
    }

    tests! {
        a_nested_scope_can_shadow_without_mutating_the_outer_binding:
            "var a = \"outer\"; { var a = \"inner\"; print a; } print a;"
            => OK "inner", "outer"
    }

    tests! {
        block_restores_the_enclosing_environment_after_a_runtime_error:
            "var a = \"outer\"; fun; { var a = \"inner\"; } print a;"
            => ERR "Undefined variable 'fun'"
    }
}
