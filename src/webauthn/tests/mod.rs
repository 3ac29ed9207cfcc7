mod helpers;

mod signature;
