pub mod excel_write;
pub mod json;
pub mod workbook;
