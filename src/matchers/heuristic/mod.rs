pub mod gt;
