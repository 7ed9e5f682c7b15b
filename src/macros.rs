//! Terse macros for everyday usage

/// Build a [`Command`](crate::Command) from a program and arguments.
///
/// ```
/// let cmd = pipecmd::cmd!("ls", "-l", "/tmp");
/// assert_eq!(cmd.to_string(), "ls -l /tmp");
/// ```
#[macro_export]
macro_rules! cmd {
    ($prog:expr $(,)?) => {{
        $crate::Command::new($prog)
    }};
    ($prog:expr, $( $arg:expr ),+ $(,)?) => {{
        let mut __c = $crate::Command::new($prog);
        $( __c = __c.arg($arg); )+
        __c
    }};
}

/// Shell-style operators for a node type:
/// `|` pipe (or run with a `Runner`), `&` and-then, `^` or-else,
/// `<<` input, `>>` append output, and the file-first `target >> node`
/// (input) / `target << node` (append output).
#[doc(hidden)]
#[macro_export]
macro_rules! impl_operators {
    (@combine $lhs:ty => $( $rhs:ty ),+) => {
        $(
            impl ::std::ops::BitOr<$rhs> for $lhs {
                type Output = $crate::Chain;
                fn bitor(self, rhs: $rhs) -> $crate::Chain { $crate::Runnable::pipe_to(&self, rhs) }
            }

            impl ::std::ops::BitAnd<$rhs> for $lhs {
                type Output = $crate::Chain;
                fn bitand(self, rhs: $rhs) -> $crate::Chain { $crate::Runnable::and_then(&self, rhs) }
            }

            impl ::std::ops::BitXor<$rhs> for $lhs {
                type Output = $crate::Chain;
                fn bitxor(self, rhs: $rhs) -> $crate::Chain { $crate::Runnable::or_else(&self, rhs) }
            }
        )+
    };

    (@file_first $lhs:ty => $( $target:ty ),+) => {
        $(
            impl ::std::ops::Shr<$lhs> for $target {
                type Output = $lhs;
                fn shr(self, node: $lhs) -> $lhs { $crate::Runnable::stdin_from(&node, self) }
            }

            impl ::std::ops::Shl<$lhs> for $target {
                type Output = $lhs;
                fn shl(self, node: $lhs) -> $lhs { $crate::Runnable::append_to(&node, self) }
            }
        )+
    };

    ($lhs:ty) => {
        $crate::impl_operators!(@combine $lhs => $crate::Command, $crate::Chain, $crate::Node);

        impl<T> ::std::ops::BitOr<$crate::Runner<T>> for $lhs {
            type Output = $crate::Result<T>;
            fn bitor(self, runner: $crate::Runner<T>) -> $crate::Result<T> { runner.apply(&self) }
        }

        impl<T> ::std::ops::BitOr<&$crate::Runner<T>> for $lhs {
            type Output = $crate::Result<T>;
            fn bitor(self, runner: &$crate::Runner<T>) -> $crate::Result<T> { runner.apply(&self) }
        }

        impl<S: Into<$crate::Stdio>> ::std::ops::Shl<S> for $lhs {
            type Output = $lhs;
            fn shl(self, input: S) -> $lhs { $crate::Runnable::stdin_from(&self, input) }
        }

        impl<S: Into<$crate::Stdio>> ::std::ops::Shr<S> for $lhs {
            type Output = $lhs;
            fn shr(self, target: S) -> $lhs { $crate::Runnable::append_to(&self, target) }
        }

        $crate::impl_operators!(@file_first $lhs => $crate::Stdio, ::std::path::PathBuf, &::std::path::Path, &str);
    };
}
