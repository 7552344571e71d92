pub trait Broken<T {
    fn a(&self);
}

pub trait Fine {
    fn b(&self, ctx: rigging::Context);
}
