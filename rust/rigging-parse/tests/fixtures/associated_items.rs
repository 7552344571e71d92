pub trait Api {
    type Output;
    const LIMIT: usize;

    #[doc(hidden)]
    fn run(&self, input: Vec<u8>) -> Self::Output;

    fn describe(&self) -> String {
        String::from("api")
    }

    async fn spawn(&self, name: String);

    fn take<T: Into<String>>(&mut self, value: T) -> HashMap<String, Vec<(u8, u16)>>
    where
        T: Clone;

    some_macro! {}
}
