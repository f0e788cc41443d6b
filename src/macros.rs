/// Declares several lazy properties on one type.
///
/// Evaluates to a `LazyResult<Vec<PropertyId>>`, stopping at the first
/// declaration that fails.
///
/// ```
/// use lazy_attrs::{lazy_props, LazyObject, TypeRegistry, Value};
///
/// let registry = TypeRegistry::default();
/// let point = registry.define_class("Point", &[]).unwrap();
/// let ids = lazy_props!(registry, point, {
///     "origin" => |_| Ok(Value::Bool(true)),
///     "label" => |this| Ok(this.attr("name").unwrap_or_default()),
/// })
/// .unwrap();
/// assert_eq!(ids.len(), 2);
/// ```
#[macro_export]
macro_rules! lazy_props {
    ($registry:expr, $ty:expr, { $($name:expr => $compute:expr),+ $(,)? }) => {
        (|| -> $crate::LazyResult<::std::vec::Vec<$crate::PropertyId>> {
            let registry = &$registry;
            let ty = &$ty;
            let mut temp = ::std::vec::Vec::new();
            $(
                temp.push(registry.declare(ty, $name, $compute)?);
            )+
            ::std::result::Result::Ok(temp)
        })()
    };
}
