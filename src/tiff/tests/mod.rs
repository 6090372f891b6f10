#![cfg(test)]

mod reader_tests;
