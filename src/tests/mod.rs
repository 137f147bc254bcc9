mod analysis_tests;
