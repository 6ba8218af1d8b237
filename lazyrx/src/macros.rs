// Left-nested pairing used to build N-ary combinations from `CombineLatest`.
// `nest_combine!(a, b, c)` builds `CombineLatest::new(CombineLatest::new(a, b), c)`
// and `nest_pattern!(a, b, c)` is the matching `((a, b), c)` pattern.

macro_rules! nest_combine {
    (@acc ($acc:expr)) => {
        $acc
    };
    (@acc ($acc:expr) $next:expr $(, $rest:expr)*) => {
        nest_combine!(@acc ($crate::CombineLatest::new($acc, $next)) $($rest),*)
    };
    ($first:expr $(, $rest:expr)+ $(,)?) => {
        nest_combine!(@acc ($first) $($rest),+)
    };
}

macro_rules! nest_pattern {
    (@acc ($acc:pat)) => {
        $acc
    };
    (@acc ($acc:pat) $next:ident $(, $rest:ident)*) => {
        nest_pattern!(@acc (($acc, $next)) $($rest),*)
    };
    ($first:ident $(, $rest:ident)+ $(,)?) => {
        nest_pattern!(@acc ($first) $($rest),+)
    };
}

pub(crate) use nest_combine;
pub(crate) use nest_pattern;
