use crate::Usize;

pub trait Sailed {}

macro_rules! capacities {
    ($($n:literal),* $(,)?) => {
        $(
            impl Sailed for Usize<$n> {}
            impl crate::ClusterCapacity for Usize<$n> {}
        )*
    };
}

capacities!(
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32, 40, 48, 50, 64, 100, 128, 256, 512,
);
