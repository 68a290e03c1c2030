pub mod adafruit;
