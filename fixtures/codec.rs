pub trait Codec<T: Clone> {
    fn encode(&self, value: &T) -> Vec<u8>;
    fn decode(&self, bytes: &[u8]) -> Option<T>;
}

pub trait FramedCodec<T: Clone>: Codec<T> {
    fn frame_len(&self) -> usize;
}

pub trait ByteCodec: Codec<String> {
    fn reset(&mut self);
}
