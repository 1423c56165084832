use super::raw_str;
use crate::mailbox::Mailbox;
use hyperx::header::{Formatter as HeaderFormatter, Header, RawLike};
use hyperx::{Error as HyperError, Result as HyperResult};
use std::fmt::Result as FmtResult;

macro_rules! mailbox_header {
    ( $type_name: ident, $header_name: expr ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $type_name(pub Mailbox);

        impl Header for $type_name {
            fn header_name() -> &'static str {
                $header_name
            }

            fn parse_header<'a, T>(raw: &'a T) -> HyperResult<$type_name>
            where
                T: RawLike<'a>,
            {
                raw_str(raw)
                    .and_then(|s| s.parse::<Mailbox>().map_err(|_| HyperError::Header))
                    .map($type_name)
            }

            fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
                f.fmt_line(&self.0)
            }
        }
    };
}

mailbox_header!(From, "From");
mailbox_header!(To, "To");
