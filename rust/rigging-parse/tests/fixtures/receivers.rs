/// Every receiver and parameter form a trait method can take.
pub trait Shapes {
    fn borrowed<'a>(&'a self, name: &'a str) -> &'a str;

    fn boxed(self: Box<Self>);

    fn owned(mut self);

    fn pair(&self, (left, right): (u8, u8)) -> u16;

    fn free() -> u8;
}
