//! Built-in `sass:` modules.
//!
//! Built-in modules have no file behind them. `@use "sass:math"` resolves to
//! the sentinel URI `sass:math` and members are looked up in the static
//! tables below.

use std::sync::Arc;

use crate::base::Uri;

use super::symbols::SymbolKind;

/// One exported member of a built-in module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinMember {
    /// Name with sigil (`$pi`, `div`).
    pub name: &'static str,
    pub kind: SymbolKind,
    pub signature: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinModule {
    /// Module name without the `sass:` scheme.
    pub name: &'static str,
    pub members: &'static [BuiltinMember],
}

impl BuiltinModule {
    pub fn uri(&self) -> Uri {
        builtin_uri(self.name)
    }

    pub fn member(&self, kind: SymbolKind, name: &str) -> Option<&'static BuiltinMember> {
        self.members.iter().find(|m| m.kind == kind && m.name == name)
    }
}

macro_rules! func {
    ($name:literal, $sig:literal, $doc:literal) => {
        BuiltinMember {
            name: $name,
            kind: SymbolKind::Function,
            signature: $sig,
            description: $doc,
        }
    };
}

macro_rules! var {
    ($name:literal, $doc:literal) => {
        BuiltinMember {
            name: $name,
            kind: SymbolKind::Variable,
            signature: "",
            description: $doc,
        }
    };
}

macro_rules! mixin {
    ($name:literal, $sig:literal, $doc:literal) => {
        BuiltinMember {
            name: $name,
            kind: SymbolKind::Mixin,
            signature: $sig,
            description: $doc,
        }
    };
}

const MATH: &[BuiltinMember] = &[
    var!("$e", "Mathematical constant e."),
    var!("$epsilon", "Difference between 1 and the smallest double greater than 1."),
    var!("$max-number", "Maximum finite number Sass can represent."),
    var!("$max-safe-integer", "Maximum integer n such that n and n + 1 are both precise."),
    var!("$min-number", "Smallest positive number Sass can represent."),
    var!("$min-safe-integer", "Minimum integer n such that n and n - 1 are both precise."),
    var!("$pi", "Mathematical constant pi."),
    func!("abs", "($number)", "Returns the absolute value of $number."),
    func!("acos", "($number)", "Returns the arccosine of $number."),
    func!("asin", "($number)", "Returns the arcsine of $number."),
    func!("atan", "($number)", "Returns the arctangent of $number."),
    func!("atan2", "($y, $x)", "Returns the 2-argument arctangent of $y and $x."),
    func!("ceil", "($number)", "Rounds $number up to the next highest whole number."),
    func!("clamp", "($min, $number, $max)", "Restricts $number to the range between $min and $max."),
    func!("compatible", "($number1, $number2)", "Returns whether the units of two numbers can be combined."),
    func!("cos", "($number)", "Returns the cosine of $number."),
    func!("div", "($number1, $number2)", "Returns the result of dividing $number1 by $number2."),
    func!("floor", "($number)", "Rounds $number down to the next lowest whole number."),
    func!("hypot", "($number...)", "Returns the length of the n-dimensional vector."),
    func!("is-unitless", "($number)", "Returns whether $number has no units."),
    func!("log", "($number, $base: null)", "Returns the logarithm of $number."),
    func!("max", "($number...)", "Returns the highest of one or more numbers."),
    func!("min", "($number...)", "Returns the lowest of one or more numbers."),
    func!("percentage", "($number)", "Converts a unitless $number to a percentage."),
    func!("pow", "($base, $exponent)", "Raises $base to the power of $exponent."),
    func!("random", "($limit: null)", "Returns a random number."),
    func!("round", "($number)", "Rounds $number to the nearest whole number."),
    func!("sin", "($number)", "Returns the sine of $number."),
    func!("sqrt", "($number)", "Returns the square root of $number."),
    func!("tan", "($number)", "Returns the tangent of $number."),
    func!("unit", "($number)", "Returns a string representation of the units of $number."),
];

const COLOR: &[BuiltinMember] = &[
    func!("adjust", "($color, $red: null, $green: null, $blue: null, $hue: null, $saturation: null, $lightness: null, $alpha: null, $space: null)", "Increases or decreases properties of $color by fixed amounts."),
    func!("alpha", "($color)", "Returns the alpha channel of $color."),
    func!("blackness", "($color)", "Returns the HWB blackness of $color."),
    func!("blue", "($color)", "Returns the blue channel of $color."),
    func!("change", "($color, $red: null, $green: null, $blue: null, $hue: null, $saturation: null, $lightness: null, $alpha: null, $space: null)", "Sets one or more properties of $color to new values."),
    func!("channel", "($color, $channel, $space: null)", "Returns the value of $channel in $space."),
    func!("complement", "($color, $space: null)", "Returns the RGB complement of $color."),
    func!("grayscale", "($color)", "Returns a gray color with the same lightness as $color."),
    func!("green", "($color)", "Returns the green channel of $color."),
    func!("hue", "($color)", "Returns the hue of $color."),
    func!("hwb", "($hue, $whiteness, $blackness, $alpha: 1)", "Returns a color with the given HWB channels."),
    func!("ie-hex-str", "($color)", "Returns an unquoted #AARRGGBB string."),
    func!("invert", "($color, $weight: 100%, $space: null)", "Returns the inverse of $color."),
    func!("is-legacy", "($color)", "Returns whether $color is in a legacy color space."),
    func!("is-missing", "($color, $channel)", "Returns whether $channel is missing in $color."),
    func!("is-powerless", "($color, $channel, $space: null)", "Returns whether $channel is powerless in $color."),
    func!("lightness", "($color)", "Returns the HSL lightness of $color."),
    func!("mix", "($color1, $color2, $weight: 50%, $method: null)", "Returns a mixture of $color1 and $color2."),
    func!("red", "($color)", "Returns the red channel of $color."),
    func!("same", "($color1, $color2)", "Returns whether two colors visually render the same."),
    func!("saturation", "($color)", "Returns the HSL saturation of $color."),
    func!("scale", "($color, $red: null, $green: null, $blue: null, $saturation: null, $lightness: null, $whiteness: null, $blackness: null, $alpha: null, $space: null)", "Fluidly scales one or more properties of $color."),
    func!("space", "($color)", "Returns the name of the color space of $color."),
    func!("to-gamut", "($color, $space: null, $method)", "Maps $color into the gamut of $space."),
    func!("to-space", "($color, $space)", "Converts $color into $space."),
    func!("whiteness", "($color)", "Returns the HWB whiteness of $color."),
];

const LIST: &[BuiltinMember] = &[
    func!("append", "($list, $val, $separator: auto)", "Returns a copy of $list with $val added to the end."),
    func!("index", "($list, $value)", "Returns the index of $value in $list."),
    func!("is-bracketed", "($list)", "Returns whether $list has square brackets."),
    func!("join", "($list1, $list2, $separator: auto, $bracketed: auto)", "Returns a list containing the elements of both lists."),
    func!("length", "($list)", "Returns the length of $list."),
    func!("nth", "($list, $n)", "Returns the element of $list at index $n."),
    func!("separator", "($list)", "Returns the name of the separator used by $list."),
    func!("set-nth", "($list, $n, $value)", "Returns a copy of $list with the element at $n replaced."),
    func!("slash", "($elements...)", "Returns a slash-separated list."),
    func!("zip", "($lists...)", "Combines every list into a single list of sub-lists."),
];

const MAP: &[BuiltinMember] = &[
    func!("deep-merge", "($map1, $map2)", "Merges two maps recursively."),
    func!("deep-remove", "($map, $key, $keys...)", "Removes a key from a nested map."),
    func!("get", "($map, $key, $keys...)", "Returns the value in $map associated with $key."),
    func!("has-key", "($map, $key, $keys...)", "Returns whether $map contains a value for $key."),
    func!("keys", "($map)", "Returns a comma-separated list of all keys in $map."),
    func!("merge", "($map1, $map2)", "Returns a new map with all keys and values from both maps."),
    func!("remove", "($map, $keys...)", "Returns a copy of $map without the given keys."),
    func!("set", "($map, $key, $value)", "Returns a copy of $map with $key set to $value."),
    func!("values", "($map)", "Returns a comma-separated list of all values in $map."),
];

const META: &[BuiltinMember] = &[
    mixin!("apply", "($mixin, $args...)", "Includes $mixin with $args."),
    mixin!("load-css", "($url, $with: null)", "Loads the module at $url and includes its CSS."),
    func!("accepts-content", "($mixin)", "Returns whether $mixin accepts a content block."),
    func!("calc-args", "($calc)", "Returns the arguments of a calculation."),
    func!("calc-name", "($calc)", "Returns the name of a calculation."),
    func!("call", "($function, $args...)", "Invokes $function with $args."),
    func!("content-exists", "()", "Returns whether the current mixin was passed a content block."),
    func!("feature-exists", "($feature)", "Returns whether the current Sass implementation supports $feature."),
    func!("function-exists", "($name, $module: null)", "Returns whether a function named $name is defined."),
    func!("get-function", "($name, $css: false, $module: null)", "Returns the function value named $name."),
    func!("get-mixin", "($name, $module: null)", "Returns the mixin value named $name."),
    func!("global-variable-exists", "($name, $module: null)", "Returns whether a global variable named $name exists."),
    func!("inspect", "($value)", "Returns a string representation of $value."),
    func!("keywords", "($args)", "Returns the keywords passed to a mixin or function that takes arbitrary arguments."),
    func!("mixin-exists", "($name, $module: null)", "Returns whether a mixin named $name exists."),
    func!("module-functions", "($module)", "Returns all functions defined in a module."),
    func!("module-mixins", "($module)", "Returns all mixins defined in a module."),
    func!("module-variables", "($module)", "Returns all variables defined in a module."),
    func!("type-of", "($value)", "Returns the type of $value."),
    func!("variable-exists", "($name)", "Returns whether a variable named $name exists in the current scope."),
];

const SELECTOR: &[BuiltinMember] = &[
    func!("append", "($selectors...)", "Combines $selectors without descendant combinators."),
    func!("extend", "($selector, $extendee, $extender)", "Extends $selector as with @extend."),
    func!("is-superselector", "($super, $sub)", "Returns whether $super matches every element $sub matches."),
    func!("nest", "($selectors...)", "Combines $selectors as though they were nested."),
    func!("parse", "($selector)", "Returns $selector in the selector value format."),
    func!("replace", "($selector, $original, $replacement)", "Replaces $original in $selector with $replacement."),
    func!("simple-selectors", "($selector)", "Returns the simple selectors in a compound selector."),
    func!("unify", "($selector1, $selector2)", "Returns a selector that matches only elements matched by both."),
];

const STRING: &[BuiltinMember] = &[
    func!("index", "($string, $substring)", "Returns the first index of $substring in $string."),
    func!("insert", "($string, $insert, $index)", "Returns a copy of $string with $insert inserted at $index."),
    func!("length", "($string)", "Returns the number of characters in $string."),
    func!("quote", "($string)", "Returns $string as a quoted string."),
    func!("slice", "($string, $start-at, $end-at: -1)", "Returns the slice of $string between two indices."),
    func!("split", "($string, $separator, $limit: null)", "Splits $string on $separator."),
    func!("to-lower-case", "($string)", "Returns a copy of $string in lower case."),
    func!("to-upper-case", "($string)", "Returns a copy of $string in upper case."),
    func!("unique-id", "()", "Returns a random unquoted string that is a valid CSS identifier."),
    func!("unquote", "($string)", "Returns $string as an unquoted string."),
];

/// Every built-in module.
pub const MODULES: &[BuiltinModule] = &[
    BuiltinModule { name: "color", members: COLOR },
    BuiltinModule { name: "list", members: LIST },
    BuiltinModule { name: "map", members: MAP },
    BuiltinModule { name: "math", members: MATH },
    BuiltinModule { name: "meta", members: META },
    BuiltinModule { name: "selector", members: SELECTOR },
    BuiltinModule { name: "string", members: STRING },
];

/// Global functions available without `@use`, as `(global, module, member)`.
const GLOBAL_FUNCTIONS: &[(&str, &str, &str)] = &[
    ("abs", "math", "abs"),
    ("adjust-color", "color", "adjust"),
    ("alpha", "color", "alpha"),
    ("append", "list", "append"),
    ("blue", "color", "blue"),
    ("call", "meta", "call"),
    ("ceil", "math", "ceil"),
    ("change-color", "color", "change"),
    ("comparable", "math", "compatible"),
    ("complement", "color", "complement"),
    ("content-exists", "meta", "content-exists"),
    ("floor", "math", "floor"),
    ("function-exists", "meta", "function-exists"),
    ("get-function", "meta", "get-function"),
    ("global-variable-exists", "meta", "global-variable-exists"),
    ("grayscale", "color", "grayscale"),
    ("green", "color", "green"),
    ("hue", "color", "hue"),
    ("ie-hex-str", "color", "ie-hex-str"),
    ("index", "list", "index"),
    ("inspect", "meta", "inspect"),
    ("invert", "color", "invert"),
    ("is-bracketed", "list", "is-bracketed"),
    ("is-superselector", "selector", "is-superselector"),
    ("join", "list", "join"),
    ("keywords", "meta", "keywords"),
    ("length", "list", "length"),
    ("lightness", "color", "lightness"),
    ("list-separator", "list", "separator"),
    ("map-get", "map", "get"),
    ("map-has-key", "map", "has-key"),
    ("map-keys", "map", "keys"),
    ("map-merge", "map", "merge"),
    ("map-remove", "map", "remove"),
    ("map-values", "map", "values"),
    ("max", "math", "max"),
    ("min", "math", "min"),
    ("mix", "color", "mix"),
    ("mixin-exists", "meta", "mixin-exists"),
    ("nth", "list", "nth"),
    ("percentage", "math", "percentage"),
    ("quote", "string", "quote"),
    ("random", "math", "random"),
    ("red", "color", "red"),
    ("round", "math", "round"),
    ("saturation", "color", "saturation"),
    ("scale-color", "color", "scale"),
    ("selector-append", "selector", "append"),
    ("selector-extend", "selector", "extend"),
    ("selector-nest", "selector", "nest"),
    ("selector-parse", "selector", "parse"),
    ("selector-replace", "selector", "replace"),
    ("selector-unify", "selector", "unify"),
    ("set-nth", "list", "set-nth"),
    ("simple-selectors", "selector", "simple-selectors"),
    ("str-index", "string", "index"),
    ("str-insert", "string", "insert"),
    ("str-length", "string", "length"),
    ("str-slice", "string", "slice"),
    ("to-lower-case", "string", "to-lower-case"),
    ("to-upper-case", "string", "to-upper-case"),
    ("type-of", "meta", "type-of"),
    ("unique-id", "string", "unique-id"),
    ("unit", "math", "unit"),
    ("unitless", "math", "is-unitless"),
    ("unquote", "string", "unquote"),
    ("variable-exists", "meta", "variable-exists"),
    ("zip", "list", "zip"),
];

pub const SCHEME: &str = "sass:";

/// Sentinel URI of a built-in module: `sass:math`.
pub fn builtin_uri(name: &str) -> Uri {
    Arc::from(format!("{SCHEME}{name}"))
}

pub fn is_builtin_uri(uri: &str) -> bool {
    uri.starts_with(SCHEME)
}

/// Look up a module by URL (`sass:math`) or bare name (`math`).
pub fn module(name: &str) -> Option<&'static BuiltinModule> {
    let name = name.strip_prefix(SCHEME).unwrap_or(name);
    MODULES.iter().find(|m| m.name == name)
}

/// Look up a global function that predates the module system.
pub fn global_function(name: &str) -> Option<(&'static BuiltinModule, &'static BuiltinMember)> {
    let (_, module_name, member) = GLOBAL_FUNCTIONS.iter().find(|(global, _, _)| *global == name)?;
    let module = module(module_name)?;
    let member = module.member(SymbolKind::Function, member)?;
    Some((module, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_lookup() {
        let math = module("sass:math").unwrap();
        assert_eq!(math.name, "math");
        assert_eq!(&*math.uri(), "sass:math");
        assert!(math.member(SymbolKind::Function, "div").is_some());
        assert!(math.member(SymbolKind::Variable, "$pi").is_some());
        assert!(math.member(SymbolKind::Function, "$pi").is_none());
        assert!(module("sass:nope").is_none());
    }

    #[test]
    fn test_global_functions_map_to_members() {
        let (map, get) = global_function("map-get").unwrap();
        assert_eq!((map.name, get.name), ("map", "get"));
        assert!(global_function("no-such-function").is_none());
        for (global, module_name, name) in GLOBAL_FUNCTIONS {
            assert!(
                module(module_name)
                    .and_then(|m| m.member(SymbolKind::Function, name))
                    .is_some(),
                "{global} maps to a missing member"
            );
        }
    }

    #[test]
    fn test_builtin_uri() {
        assert!(is_builtin_uri("sass:color"));
        assert!(!is_builtin_uri("file:///a.scss"));
    }
}
