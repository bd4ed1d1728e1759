//! Error code definitions and documentation

/// Symbol table construction (STB0xx)
pub mod symbols {
    pub const DUPLICATE_DEFINITION: &str = "STB001";
    pub const DUPLICATE_MEMBER: &str = "STB002";
    pub const DUPLICATE_PATTERN_BINDING: &str = "STB003";
    pub const OR_PATTERN_BINDING_MISMATCH: &str = "STB004";
}

/// Inference and checking (TC0xx)
pub mod types {
    pub const UNRESOLVED_IDENTIFIER: &str = "TC001";
    pub const TYPE_MISMATCH: &str = "TC002";
    pub const UNKNOWN_TYPE: &str = "TC003";
    pub const ARITHMETIC_OPERANDS: &str = "TC004";
    pub const BITWISE_OPERANDS: &str = "TC005";
    pub const COMPARISON_OPERANDS: &str = "TC006";
    pub const LOGICAL_OPERANDS: &str = "TC007";
    pub const WRONG_ARGUMENT_COUNT: &str = "TC008";
    pub const UNKNOWN_FIELD: &str = "TC009";
    pub const UNRESOLVED_METHOD: &str = "TC011";
    pub const NOT_CALLABLE: &str = "TC012";
    pub const UNARY_OPERAND: &str = "TC013";
    pub const UNWRAP_NON_OPTIONAL: &str = "TC014";
    pub const FORCE_UNWRAP_NON_OPTIONAL: &str = "TC015";
    pub const NON_BOOL_CONDITION: &str = "TC016";
    pub const NOT_INDEXABLE: &str = "TC017";
    pub const NOT_ITERABLE: &str = "TC018";
    pub const ASSIGN_TO_IMMUTABLE: &str = "TC024";
    pub const ASSIGNMENT_TYPE_MISMATCH: &str = "TC025";
    pub const INVALID_ASSIGNMENT_TARGET: &str = "TC026";
    pub const FIELD_INITIALIZER_MISMATCH: &str = "TC027";
    pub const RETURN_TYPE_MISMATCH: &str = "TC030";
    pub const ASYNC_RETURN_TYPE_MISMATCH: &str = "TC031";
    pub const RETURN_OUTSIDE_FUNCTION: &str = "TC032";
}

/// Concurrency context rules (TC01x/TC02x)
pub mod concurrency {
    pub const AWAIT_OUTSIDE_ASYNC: &str = "TC010";
    pub const CONCURRENT_OUTSIDE_ASYNC: &str = "TC019";
    pub const RACE_OUTSIDE_ASYNC: &str = "TC020";
    pub const TIMEOUT_OUTSIDE_ASYNC: &str = "TC021";
    pub const DUPLICATE_CONCURRENT_BINDING: &str = "TC022";
    pub const NON_NUMERIC_TIMEOUT: &str = "TC023";
}

/// Trait registration, conformance and dispatch (TRAIT0xx)
pub mod traits {
    pub const DUPLICATE_TRAIT: &str = "TRAIT001";
    pub const DUPLICATE_TRAIT_METHOD: &str = "TRAIT002";
    pub const MISSING_RETURN_TYPE: &str = "TRAIT003";
    pub const UNKNOWN_TRAIT: &str = "TRAIT004";
    pub const MISSING_METHOD: &str = "TRAIT005";
    pub const PARAMETER_COUNT_MISMATCH: &str = "TRAIT006";
    pub const PARAMETER_TYPE_MISMATCH: &str = "TRAIT007";
    pub const RETURN_TYPE_MISMATCH: &str = "TRAIT008";
    pub const AMBIGUOUS_METHOD: &str = "TRAIT009";
    pub const TRAIT_LACKS_METHOD: &str = "TRAIT010";
    pub const TYPE_DOES_NOT_IMPLEMENT: &str = "TRAIT011";
    pub const NO_CONCRETE_METHOD: &str = "TRAIT012";
    pub const UNSATISFIED_BOUND: &str = "TRAIT013";
    pub const METHOD_NOT_IN_TRAIT: &str = "TRAIT014";
    pub const DUPLICATE_IMPL: &str = "TRAIT015";
}

/// Match analysis (EXH0xx)
pub mod patterns {
    pub const EMPTY_MATCH: &str = "EXH001";
    pub const NON_EXHAUSTIVE_MATCH: &str = "EXH002";
    pub const UNREACHABLE_ARM: &str = "EXH003";
}

/// Long-form explanation for `lumen explain <CODE>`
pub fn explain(code: &str) -> Option<&'static str> {
    let text = match code {
        "STB001" => "A name was defined twice in the same scope. Shadowing a name from an enclosing scope is allowed; redefining it in the exact same scope is not. The first definition is kept.",
        "STB002" => "A class, struct or data declaration declares the same member (field, method or variant) twice.",
        "STB003" => "A single pattern binds the same variable name more than once, e.g. `(x, x)`.",
        "STB004" => "The alternatives of an or-pattern bind different names, e.g. `0 | n`. A name bound on only one side has no value when the other side matches. The name is still defined for the arm so its uses are not reported again.",
        "TC001" => "An identifier could not be found in any enclosing scope. Analysis continues with the name typed as `Any`.",
        "TC002" => "A value's inferred type does not match the type written in an annotation or declaration.",
        "TC003" => "A type annotation names a type that is not declared, not built in, and not a type parameter in scope.",
        "TC004" => "Arithmetic operators (`+ - * / % ^`) require numeric operands. The result is `Float` when either side is `Float`, otherwise `Int`.",
        "TC005" => "Bitwise operators require both operands to be `Int`.",
        "TC006" => "The two sides of a comparison have incompatible types. Only reported when `strict_comparisons` is enabled.",
        "TC007" => "Logical operators `&&` and `||` require `Bool` operands.",
        "TC008" => "A function was called with a different number of arguments than it declares.",
        "TC009" => "The field does not exist on the receiver's declared type.",
        "TC010" => "`await` may only appear inside an `async` function or method. Mark the enclosing function `async`.",
        "TC011" => "No method of that name exists on the receiver type, in an inherent impl, or in any implemented trait.",
        "TC012" => "The callee's type is not a function type.",
        "TC013" => "Unary `-` requires a numeric operand; unary `!` requires `Bool`.",
        "TC014" => "The unwrap operator `?` can only be applied to an optional value.",
        "TC015" => "Force-unwrapping a value that is not optional has no effect.",
        "TC016" => "Conditions of `if` and `while` must be `Bool`.",
        "TC017" => "Indexing requires an array, list, map or string.",
        "TC018" => "A `for` loop iterates over a value that is not an array, list, set, map or string.",
        "TC019" => "A `concurrent` block may only appear inside an `async` function or method.",
        "TC020" => "A `race` block may only appear inside an `async` function or method.",
        "TC021" => "A `timeout` block may only appear inside an `async` function or method.",
        "TC022" => "Every binding inside one `concurrent` block must have a distinct name.",
        "TC023" => "The duration of a `timeout` must be numeric.",
        "TC024" => "The assignment target was not declared mutable. Declare it with `let mut`.",
        "TC025" => "The assigned value's type is not compatible with the target's type.",
        "TC026" => "Only identifiers, field accesses and index expressions can be assigned to.",
        "TC027" => "A field initializer's type does not match the field's declared type.",
        "TC030" => "The type of a function body (or a `return` value) does not match the declared return type.",
        "TC031" => "An async function's body type does not match its declared return type. Reported as a warning unless `async_return_mismatch = \"error\"`.",
        "TC032" => "`return` appears outside of any function or method body.",
        "TRAIT001" => "Two traits share the same name.",
        "TRAIT002" => "A trait declares the same method name twice.",
        "TRAIT003" => "Every trait method signature must declare an explicit return type.",
        "TRAIT004" => "The trait named in an impl or qualified call has not been declared.",
        "TRAIT005" => "An impl does not provide a method required by its trait.",
        "TRAIT006" => "An impl method takes a different number of parameters than the trait signature.",
        "TRAIT007" => "An impl method parameter's type differs from the trait signature at the same position.",
        "TRAIT008" => "An impl method's return type differs from the trait signature.",
        "TRAIT009" => "More than one implemented trait provides the called method for this receiver type. Use a qualified call `receiver.Trait::method()`.",
        "TRAIT010" => "A qualified call names a trait that does not declare the method.",
        "TRAIT011" => "A qualified call names a trait the receiver type does not implement.",
        "TRAIT012" => "The receiver implements the trait, but no impl provides a body for the method.",
        "TRAIT013" => "A generic argument does not implement a trait required by the type parameter's bounds.",
        "TRAIT014" => "An impl defines a method that its trait does not declare.",
        "TRAIT015" => "The same trait is implemented twice for the same type.",
        "EXH001" => "A `match` expression has no arms.",
        "EXH002" => "No unconditional catch-all arm was found and exhaustiveness could not be proven. Add a trailing `_` arm.",
        "EXH003" => "The arm can never be reached because an earlier unguarded catch-all arm matches everything.",
        _ => return None,
    };
    Some(text)
}
