#[macro_use]
mod common;

#[cfg(test)]
mod self_expr {
    tests! {
        a_closure_inside_a_method_captures_self:
            r#"
            class Foo {
                getClosure() { def closure() { print self; } return closure; }
            }
            Foo().getClosure()();
            "#
            => OK "Foo instance"
    }

    tests! {
        a_method_on_a_nested_class_sees_its_own_self_not_the_enclosing_ones:
            r#"
            class Outer {
                method() {
                    print self;
                    def inside() {
                        class Inner { method() { print self; } }
                        Inner().method();
                    }
                    inside();
                }
            }
            Outer().method();
            "#
            => OK "Outer instance", "Inner instance"
    }

    tests! {
        a_closure_declared_and_called_inside_a_method_still_sees_self:
            r#"
            class Foo {
                method() { def show() { print self; } show(); }
            }
            Foo().method();
            "#
            => OK "Foo instance"
    }

    tests! {
        self_at_top_level_is_a_resolve_error:
            "print self;"
            => ERR "Cannot use 'self' outside of a class"
    }

    tests! {
        self_inside_a_method_refers_to_the_receiving_instance:
            r#"
            class Foo {
                bar() { self.baz = "baz"; print self.baz; }
            }
            Foo().bar();
            "#
            => OK "baz"
    }

    tests! {
        self_inside_a_top_level_function_is_a_resolve_error:
            "def f() { print self; }"
            => ERR "Cannot use 'self' outside of a class"
    }
}
