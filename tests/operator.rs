#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        plus_adds_numbers_and_concatenates_strings:
            r#"
            print 123 + 456;
            print "str" + "ing";
            "#
            => OK "579", "string"
    }

    tests! {
        plus_between_mismatched_kinds_is_a_runtime_error:
            "print 1 + \"a\";"
            => ERR "Operands must be two numbers or two strings"
    }

    tests! {
        comparisons_order_numbers:
            r#"
            print 1 < 2;
            print 2 < 2;
            print 2 < 1;
            print 1 <= 2;
            print 2 <= 2;
            print 2 <= 1;
            print 1 > 2;
            print 2 > 2;
            print 2 > 1;
            print 1 >= 2;
            print 2 >= 2;
            print 2 >= 1;
            "#
            => OK "true", "false", "false", "true", "true", "false", "false", "false", "true", "false", "true", "true"
    }

    tests! {
        comparing_a_non_number_is_a_runtime_error:
            "print 1 < \"a\";"
            => ERR "Operands must be numbers"
    }

    tests! {
        divide_computes_a_quotient_and_follows_ieee_754_for_division_by_zero:
            r#"
            print 8 / 2;
            print 10 / 5 / 2;
            print 1 / 0;
            "#
            => OK "4", "1", "inf"
    }

    tests! {
        dividing_a_non_number_is_a_runtime_error:
            "print 1 / \"a\";"
            => ERR "Operands must be numbers"
    }

    tests! {
        equality_holds_between_equal_numbers_and_strings:
            r#"
            print 1 == 1;
            print "a" == "a";
            print 1 == 2;
            print "a" == "b";
            print 1 == "1";
            print nil == nil;
            print nil == false;
            "#
            => OK "true", "true", "false", "false", "false", "true", "false"
    }

    tests! {
        classes_and_instances_compare_by_identity_not_by_structure:
            r#"
            class Foo {}
            class Bar {}
            print Foo == Foo;
            print Foo == Bar;
            var a = Foo(); var b = Foo();
            print a == a;
            print a == b;
            "#
            => OK "true", "false", "true", "false"
    }

    tests! {
        each_property_access_rebinds_a_fresh_method_so_they_compare_unequal:
            r#"
            class Foo { bar() {} }
            var foo = Foo();
            print foo.bar == foo.bar;
            "#
            => OK "false"
    }

    tests! {
        multiply_scales_numbers:
            r#"
            print 5 * 3;
            print 1.5 * 3;
            print 0 * 100;
            "#
            => OK "15", "4.5", "0"
    }

    tests! {
        multiplying_a_non_number_is_a_runtime_error:
            "print 1 * \"a\";"
            => ERR "Operands must be numbers"
    }

    tests! {
        unary_minus_negates_a_number:
            r#"
            print -(3);
            print --(3);
            print -(-3);
            "#
            => OK "-3", "3", "3"
    }

    tests! {
        unary_minus_on_a_non_number_is_a_runtime_error:
            "print -\"a\";"
            => ERR "Operand must be a number"
    }

    tests! {
        unary_bang_negates_truthiness_for_every_kind_of_value:
            r#"
            print !true;
            print !false;
            print !nil;
            print !123;
            "#
            => OK "false", "true", "true", "false"
    }

    tests! {
        unary_bang_works_on_classes_and_instances_too:
            r#"
            class Foo {}
            print !Foo;
            print !Foo();
            "#
            => OK "false", "false"
    }

    tests! {
        subtract_computes_a_difference:
            r#"
            print 4 - 3;
            print 1 - 1;
            print 1 - 5;
            "#
            => OK "1", "0", "-4"
    }
}
