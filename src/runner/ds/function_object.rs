use crate::runner::ds::error::EvalErrorType;
use crate::runner::ds::value::Value;

pub type NativeFunction = dyn Fn(&[Value]) -> Result<Value, EvalErrorType>;

/// A named callable leaf. Functions are scalars for the structural
/// operations: they are shared on copy and compared by identity.
pub struct FunctionObject {
    pub name: String,
    function: Box<NativeFunction>,
}

impl FunctionObject {
    pub fn new(
        name: &str,
        function: impl Fn(&[Value]) -> Result<Value, EvalErrorType> + 'static,
    ) -> Self {
        FunctionObject {
            name: name.to_string(),
            function: Box::new(function),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, EvalErrorType> {
        (self.function)(args)
    }
}
