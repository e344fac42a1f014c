#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        an_empty_class_prints_its_bare_name:
            "class Foo {} print Foo;"
            => OK "Foo"
    }

    tests! {
        a_class_cannot_inherit_from_itself:
            "class Foo : Foo {}"
            => ERR "A class cannot inherit from itself"
    }

    tests! {
        a_subclass_inherits_methods_it_does_not_override:
            r#"
            class A { foo() { print "in foo"; } }
            class B : A {
                bar() { print "in bar"; }
                baz() { print "in baz"; }
            }
            var b = B();
            b.foo(); b.bar(); b.baz();
            "#
            => OK "in foo", "in bar", "in baz"
    }

    tests! {
        a_method_can_reference_its_own_class_by_name:
            "class Foo { identify() { print Foo; } } Foo().identify();"
            => OK "Foo"
    }

    tests! {
        a_class_declared_inside_a_block_is_scoped_to_that_block:
            "{ class Foo {} print Foo; }"
            => OK "Foo"
    }

    tests! {
        instantiating_a_class_with_no_init_produces_a_bare_instance:
            "class Foo {} print Foo();"
            => OK "Foo instance"
    }
}
