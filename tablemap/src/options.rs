/// How data values reach the database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Embed data values as quoted SQL literals instead of binding them as `?` parameters.
    ///
    /// Predicate parameters are bound either way.
    pub inline_literals: bool,
}

impl Options {
    pub fn inline_literals(mut self, inline: bool) -> Self {
        self.inline_literals = inline;
        self
    }
}
