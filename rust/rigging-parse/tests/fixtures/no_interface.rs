pub struct Config {
    pub name: String,
}

pub enum Mode {
    Fast,
    Slow,
}
